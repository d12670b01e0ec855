use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("declutter")
        .version("1.0.0")
        .author("Declutter Contributors")
        .about("Clean HTML files and separate their tables")
        .arg(
            clap::arg!([INPUT] "Local HTML file (prompted for when omitted)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-s --select <N> "Run an operation without the menu")
                .action(clap::ArgAction::Append)
                .value_parser(["0", "1", "2", "3", "clean", "remove_tables", "separate_tables", "save_content"]),
        )
        .arg(
            clap::arg!(--out_dir <DIR> "Directory for output files (default: next to the input)")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--from_cleaned "Extract content from the cleaned page instead of the original"))
        .arg(clap::arg!(--keep_images "Keep images when cleaning"))
        .arg(clap::arg!(--keep_spans "Keep span elements when cleaning"))
        .arg(clap::arg!(--keep_lang "Keep lang attributes when cleaning"))
        .arg(clap::arg!(--no_wrap_images "Do not wrap paragraphs that held images"))
        .arg(clap::arg!(--keep_empty "Keep empty elements and empty tables"))
        .arg(clap::arg!(--strict "Treat missing tables or content as a failure"))
        .arg(clap::arg!(--json "Print a JSON report for every operation on stdout"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "declutter", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "declutter", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "declutter", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "declutter", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
