//! Host-side helper: `cargo run` builds the gallery with wasm-pack into
//! `static/pkg` and serves `static/` on http://127.0.0.1:8000.

use std::process::{exit, Command, ExitStatus, Stdio};
use std::{env, io};

const PORT: &str = "8000";

fn run(cmd: &str, args: &[&str]) -> io::Result<ExitStatus> {
    println!("$ {cmd} {}", args.join(" "));
    Command::new(cmd).args(args).status()
}

fn main() {
    // Only meaningful on non-wasm targets.
    if env::var("TARGET").unwrap_or_default() == "wasm32-unknown-unknown" {
        return;
    }

    let profile = if env::args().any(|a| a == "--dev") { "--dev" } else { "--release" };
    match run("wasm-pack", &["build", profile, "--target", "web", "--out-dir", "static/pkg"]) {
        Ok(status) if status.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack build failed");
            exit(1);
        }
        Err(_) => {
            eprintln!(
                "wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/); \
                 serving whatever is already in static/pkg"
            );
        }
    }

    println!("Serving static/ at http://127.0.0.1:{PORT} (Ctrl-C to stop)");
    let served = Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();
    match served {
        Ok(status) if status.success() => {}
        Ok(status) => exit(status.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            exit(1);
        }
    }
}
