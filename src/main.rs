use cuenteria::cli::parse_args;
use cuenteria::config::CONFIG;
use cuenteria::run_with_config;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };
    let config = match &*CONFIG {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[cuenteria] {e}");
            std::process::exit(e.exit_code());
        }
    };
    match run_with_config(cmd, config) {
        Ok(out) => {
            println!("{}", out.render());
            std::process::exit(out.exit_code());
        }
        Err(e) => {
            eprintln!("[cuenteria] {e}");
            std::process::exit(e.exit_code());
        }
    }
}
