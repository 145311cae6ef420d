use clap::Parser;
use lol::cli::Args;

// Single test: the process environment is shared by every test in a binary.
#[test]
fn boolean_env_vars_accept_common_spellings() {
    unsafe {
        std::env::set_var("LOL_FORCE", "1");
        std::env::set_var("LOL_VERBOSE", "TRUE");
        std::env::set_var("LOL_QUIET", "0");
        std::env::set_var("LOL_DEBUG", "off");
    }
    let args = Args::try_parse_from(["lol", "main.tex"]).expect("env values parse");
    assert!(args.force);
    assert!(args.verbose);
    assert!(!args.quiet);
    assert!(!args.debug);
}
