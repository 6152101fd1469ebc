// Writes the tahap(1) man page; output directory defaults to ./man

use clap::CommandFactory;
use clap_mangen::Man;
use std::path::PathBuf;
use tahap::cli::Cli;

fn main() -> anyhow::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();
    let mut buffer = Vec::new();
    Man::new(cmd.clone()).render(&mut buffer)?;
    std::fs::write(out_dir.join("tahap.1"), buffer)?;

    for sub in cmd.get_subcommands() {
        let mut buffer = Vec::new();
        Man::new(sub.clone()).render(&mut buffer)?;
        std::fs::write(out_dir.join(format!("tahap-{}.1", sub.get_name())), buffer)?;
    }

    println!("Wrote man pages to {}", out_dir.display());
    Ok(())
}
