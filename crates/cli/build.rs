use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let path_arg = |arg: clap::Arg| arg.value_parser(clap::value_parser!(std::path::PathBuf));
    let pause = || clap::arg!(--pause <SECS> "Delay between requests in seconds");

    let mut cmd = clap::Command::new("ttharvest")
        .version(env!("CARGO_PKG_VERSION"))
        .author("ttharvest contributors")
        .about("Harvest table-tennis coaching articles")
        .subcommand_required(true)
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds (default: 15, or 600 for submit)").global(true))
        .arg(
            clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests")
                .value_name("UA")
                .global(true),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(
            clap::Command::new("links")
                .about("Print the links between two section markers of a page")
                .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
                .arg(clap::arg!(--start <LABEL> "Section label to start after").required(true))
                .arg(clap::arg!(--stop <LABEL> "Section label to stop before (default: end of page)"))
                .arg(clap::arg!(--"base-url" <URL> "Base URL for relative links (default: the input URL)"))
                .arg(clap::arg!(--block <HOST> "Blocked host; repeat to block several").action(clap::ArgAction::Append))
                .arg(clap::arg!(--"max-links" <NUM> "Keep at most this many links"))
                .arg(
                    clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                        .default_value("text")
                        .value_parser(["text", "json"]),
                ),
        )
        .subcommand(
            clap::Command::new("articles")
                .about("Crawl the TableTennisCoaching.com articles index")
                .arg(path_arg(
                    clap::arg!(-o --output <FILE> "Batch file to write").default_value("ttc_batch_for_gpt.txt"),
                ))
                .arg(path_arg(
                    clap::arg!(--skipped <FILE> "File listing the external links that were not fetched")
                        .default_value("ttc_skipped_external_links.txt"),
                ))
                .arg(clap::arg!(--"max-links" <NUM> "Keep at most this many links"))
                .arg(pause())
                .arg(path_arg(clap::arg!(--debug <DIR> "Write the cleaned index page and marker labels to this directory"))),
        )
        .subcommand(
            clap::Command::new("tips")
                .about("Crawl the TableTennisCoaching.com Tip of the Week archive")
                .arg(path_arg(
                    clap::arg!(-o --output <FILE> "Batch file to write").default_value("ttc_tip_of_the_week_for_gpt.txt"),
                ))
                .arg(clap::arg!(--"max-pages" <NUM> "Stop after this many index pages"))
                .arg(pause()),
        )
        .subcommand(
            clap::Command::new("pingskills")
                .about("Crawl the PingSkills blog")
                .arg(path_arg(
                    clap::arg!(-o --output <FILE> "Batch file to write").default_value("batch_for_gpt.txt"),
                ))
                .arg(clap::arg!(--"max-links" <NUM> "Keep at most this many links"))
                .arg(pause()),
        )
        .subcommand(
            clap::Command::new("submit")
                .about("Post a batch file to the processing server")
                .arg(path_arg(clap::arg!(<FILE> "Batch file to post")))
                .arg(clap::arg!(--"api-url" <URL> "Processing endpoint").default_value("http://127.0.0.1:8000/process")),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "ttharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "ttharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "ttharvest", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "ttharvest", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
