use std::process;

fn main() {
    match markdown_sync_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("markdown-sync error: {err:#}");
            process::exit(1);
        }
    }
}
