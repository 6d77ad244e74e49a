//! `ClangFormat` against a shell-script stand-in.
#![cfg(unix)]

use fmtwatch_runtime::{ClangFormat, FormatterConfig, FormatterGateway, ProbeError};
use fmtwatch_testing::TestWorld;
use fmtwatch_testing::fixtures::{
    FAKE_VERSION_LINE, FORMATTED_SOURCE, UNFORMATTED_SOURCE, write_fake_clang_format,
    write_version_script,
};

fn config_for(program: &std::path::Path) -> FormatterConfig {
    FormatterConfig {
        program: program.to_string_lossy().into_owned(),
        args: vec!["--style=file".to_string()],
    }
}

#[test]
fn test_probe_check_and_apply() {
    let world = TestWorld::new();
    let program = write_fake_clang_format(world.bin_dir()).unwrap();
    let gateway = ClangFormat::probe(&config_for(&program)).unwrap();
    assert_eq!(gateway.version(), FAKE_VERSION_LINE);
    assert_eq!(gateway.program(), program);

    let clean = world.write_source("clean.cpp", FORMATTED_SOURCE).unwrap();
    let dirty = world.write_source("dirty.cpp", UNFORMATTED_SOURCE).unwrap();

    assert!(gateway.check(&clean));
    assert!(!gateway.check(&dirty));
    // Checking never writes.
    assert_eq!(world.read(&dirty).unwrap(), UNFORMATTED_SOURCE);

    assert!(gateway.apply(&dirty));
    assert_eq!(world.read(&dirty).unwrap(), FORMATTED_SOURCE);
    assert!(gateway.check(&dirty));
}

#[test]
fn test_missing_file_is_failure_not_panic() {
    let world = TestWorld::new();
    let program = write_fake_clang_format(world.bin_dir()).unwrap();
    let gateway = ClangFormat::probe(&config_for(&program)).unwrap();
    let gone = world.root().join("gone.cpp");

    assert!(!gateway.check(&gone));
    assert!(!gateway.apply(&gone));
}

#[test]
fn test_probe_rejects_bad_version_output() {
    let world = TestWorld::new();

    let failing = write_version_script(world.bin_dir(), "fails", "", 3).unwrap();
    let err = ClangFormat::probe(&config_for(&failing)).unwrap_err();
    assert!(matches!(err, ProbeError::ExitCode { code: 3, .. }));

    let silent = write_version_script(world.bin_dir(), "silent", "", 0).unwrap();
    let err = ClangFormat::probe(&config_for(&silent)).unwrap_err();
    assert!(matches!(err, ProbeError::NoOutput { .. }));

    let chatty = write_version_script(world.bin_dir(), "chatty", "one\ntwo\n", 0).unwrap();
    let err = ClangFormat::probe(&config_for(&chatty)).unwrap_err();
    assert!(matches!(err, ProbeError::MultipleLines { .. }));
}
