use std::fs;
use std::path::Path;

use msdk::natives::{
    stage_native_libraries, OsFamily, Platform, ResourceBundle, SearchPath, StagingError,
};

const PLATFORMS: [(&str, &str, &str); 3] = [
    ("Windows 10", "amd64", "windows64"),
    ("Linux", "x86", "linux32"),
    ("Mac OS X", "aarch64", "mac64"),
];

fn populate(root: &Path, platform: &Platform, skip_second: bool) -> Vec<(String, Vec<u8>)> {
    let dir = root.join("glpk-4.60").join(platform.folder_name());
    fs::create_dir_all(&dir).unwrap();
    let names = msdk::natives::required_files(&platform.os).unwrap();
    let mut written = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if skip_second && i == 1 {
            continue;
        }
        let content = format!("{name} for {platform}").into_bytes();
        fs::write(dir.join(name), &content).unwrap();
        written.push((name.to_string(), content));
    }
    written
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_platform_resolution() {
    for (os, arch, tag) in PLATFORMS {
        assert_eq!(Platform::from_names(os, arch).folder_name(), tag);
    }
    for os in ["WINDOWS", "gnu/LINUX", "macOS"] {
        assert!(OsFamily::from_name(os).is_supported(), "{os}");
    }
    assert_eq!(OsFamily::from_name("FreeBSD").tag(), "unknown");
    assert_eq!(Platform::from_names("Linux", "ppc64le").folder_name(), "linux32");
}

#[test_log::test]
fn test_round_trip() {
    for (os, arch, _) in PLATFORMS {
        let resources = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let platform = Platform::from_names(os, arch);
        let expected = populate(resources.path(), &platform, false);

        let missing = resources.path().join("not-a-directory");
        let search_path = SearchPath::from_directories([missing, target.path().to_path_buf()]);
        let bundle = ResourceBundle::glpk(resources.path());
        let staged = stage_native_libraries(&search_path, &platform, &bundle).unwrap();

        assert_eq!(staged.directory, target.path());
        assert_eq!(entries(target.path()), 2);
        for (name, content) in expected {
            assert_eq!(fs::read(target.path().join(name)).unwrap(), content);
        }
    }
}

#[test_log::test]
fn test_no_writable_directory() {
    let resources = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let platform = Platform::from_names("Linux", "amd64");
    populate(resources.path(), &platform, false);

    let file = scratch.path().join("plain-file");
    fs::write(&file, b"").unwrap();
    let search_path =
        SearchPath::from_directories([scratch.path().join("missing"), file.clone()]);
    let bundle = ResourceBundle::glpk(resources.path());

    let err = stage_native_libraries(&search_path, &platform, &bundle).unwrap_err();
    assert!(matches!(err, StagingError::Configuration(_)), "{err}");
    assert_eq!(entries(scratch.path()), 1);

    let err = stage_native_libraries(&SearchPath::parse(""), &platform, &bundle).unwrap_err();
    assert!(matches!(err, StagingError::Configuration(_)), "{err}");
}

#[test_log::test]
fn test_missing_resource_writes_nothing() {
    let resources = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let platform = Platform::from_names("Linux", "amd64");
    populate(resources.path(), &platform, true);

    let search_path = SearchPath::from_directories([target.path().to_path_buf()]);
    let bundle = ResourceBundle::glpk(resources.path());
    match stage_native_libraries(&search_path, &platform, &bundle) {
        Err(StagingError::ResourceNotFound(path)) => {
            assert!(path.ends_with("linux64/libglpk_java.so"), "{}", path.display())
        }
        other => panic!("Expected a missing resource, got {other:?}"),
    }
    assert!(!target.path().join("libglpk.so").exists());
    assert_eq!(entries(target.path()), 0);
}

#[test]
fn test_unsupported_platform() {
    let resources = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let platform = Platform::from_names("Haiku", "x86_64");
    let search_path = SearchPath::from_directories([target.path().to_path_buf()]);
    let err = stage_native_libraries(&search_path, &platform, &ResourceBundle::glpk(resources.path()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported OS (Haiku), cannot load GLPK libraries");
    assert_eq!(entries(target.path()), 0);
}

#[test_log::test]
fn test_blocked_target_restores_previous_libraries() {
    let resources = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let platform = Platform::from_names("Windows 10", "amd64");
    populate(resources.path(), &platform, false);
    fs::write(target.path().join("glpk_4_60.dll"), b"previous release").unwrap();
    fs::create_dir(target.path().join("glpk_4_60_java.dll")).unwrap();

    let search_path = SearchPath::from_directories([target.path().to_path_buf()]);
    let bundle = ResourceBundle::glpk(resources.path());
    let err = stage_native_libraries(&search_path, &platform, &bundle).unwrap_err();
    assert!(matches!(err, StagingError::IOError(_)), "{err}");

    assert_eq!(
        fs::read(target.path().join("glpk_4_60.dll")).unwrap(),
        b"previous release"
    );
    assert!(target.path().join("glpk_4_60_java.dll").is_dir());
    assert_eq!(entries(target.path()), 2);
}
