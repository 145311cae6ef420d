use lol::{
    files::{collect, Files},
    params::{Parameters, Settings, MAIN_NAME_IF_STDIN},
};
use std::fs;
use std::path::Path;

fn path_str(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.tex"), b"\\documentclass{article}").unwrap();
    fs::write(dir.path().join("style.sty"), b"% style").unwrap();
    fs::write(dir.path().join("notes.md"), b"# notes").unwrap();
    fs::create_dir(dir.path().join("images")).unwrap();
    fs::write(dir.path().join("images").join("logo.png"), b"PNG").unwrap();
    dir
}

fn params(patterns: Vec<String>, piped: bool) -> Parameters {
    Parameters::resolve(
        Settings {
            patterns,
            ..Default::default()
        },
        piped,
    )
    .unwrap()
}

#[test]
fn main_only() {
    let dir = project();
    let main = path_str(&dir.path().join("main.tex"));
    let files = collect(&params(vec![main.clone()], false), std::io::empty()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files.get(&main), Some(&b"\\documentclass{article}"[..]));
}

#[test]
fn patterns_and_folders() {
    let dir = project();
    let root = path_str(dir.path());
    let p = params(
        vec![
            format!("{root}/main.tex"),
            format!("{root}/*.sty"),
            format!("{root}/images"),
            format!("{root}/*.tex"),
        ],
        false,
    );
    let files = collect(&p, std::io::empty()).unwrap();
    assert!(files.contains(&format!("{root}/main.tex")));
    assert!(files.contains(&format!("{root}/style.sty")));
    assert!(files.contains(&format!("{root}/images/logo.png")));
    assert!(!files.contains(&format!("{root}/notes.md")));
    assert_eq!(files.len(), 3);
}

#[test]
fn missing_main_is_an_error() {
    let dir = project();
    let main = path_str(&dir.path().join("absent.tex"));
    let err = collect(&params(vec![main], false), std::io::empty()).unwrap_err();
    assert!(format!("{err:#}").contains("reading the main file"));
}

#[test]
fn unmatched_and_invalid_patterns_are_skipped() {
    let dir = project();
    let root = path_str(dir.path());
    let p = params(
        vec![
            format!("{root}/main.tex"),
            format!("{root}/*.bib"),
            format!("{root}/[.png"),
        ],
        false,
    );
    let files = collect(&p, std::io::empty()).unwrap();
    assert_eq!(files.len(), 1);
}

#[test]
fn piped_main_is_read_from_stdin() {
    let dir = project();
    let root = path_str(dir.path());
    let p = params(vec![format!("{root}/*.sty")], true);
    let stdin: &[u8] = b"\\begin{document}hi\\end{document}";
    let files = collect(&p, stdin).unwrap();
    assert_eq!(files.get(MAIN_NAME_IF_STDIN), Some(stdin));
    assert!(files.contains(&format!("{root}/style.sty")));
}

#[test]
fn listing_shows_names_and_sizes() {
    let mut files = Files::new();
    files.insert("main.tex", b"abc".to_vec());
    files.insert("img/a.png", vec![0; 10]);
    assert_eq!(files.total_bytes(), 13);
    assert_eq!(
        files.to_string(),
        "Files:\n » img/a.png (10 bytes)\n » main.tex (3 bytes)\n"
    );
}

#[test]
fn dot_slash_main_matches_globbed_name() {
    // relative to the package root, where cargo runs integration tests
    let p = params(
        vec!["./Cargo.toml".into(), "*.toml".into(), "./Cargo.toml".into()],
        false,
    );
    let files = collect(&p, std::io::empty()).unwrap();
    assert!(files.contains("Cargo.toml"));
    assert!(files.contains("lol.example.toml"));
    assert!(!files.iter().any(|(name, _)| name.starts_with("./")));
}

#[test]
fn unix_names_drop_leading_dot_slash() {
    use lol::util::unix_name;

    assert_eq!(unix_name("./main.tex"), "main.tex");
    assert_eq!(unix_name("././img/a.png"), "img/a.png");
    assert_eq!(unix_name("../shared/x.sty"), "../shared/x.sty");
    assert_eq!(unix_name("/abs/main.tex"), "/abs/main.tex");
}
