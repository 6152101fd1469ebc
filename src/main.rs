use tahap::cli::run;
use tahap::schedule::ScheduleError;

fn main() {
    if let Err(e) = run() {
        let user_facing = e
            .downcast_ref::<ScheduleError>()
            .map(ScheduleError::is_user_error)
            .unwrap_or(false);

        if user_facing {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        // Storage failures and anything else unexpected
        eprintln!("Internal error: {}", e);
        let mut causes = e.chain().skip(1).peekable();
        if causes.peek().is_some() {
            eprintln!("\nCaused by:");
            for (indent, cause) in causes.enumerate() {
                eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
            }
        }
        std::process::exit(2);
    }
}
