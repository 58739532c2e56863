use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let output = match Command::new("rustup").args(["target", "list", "--installed"]).output() {
        Ok(output) => output,
        Err(_) => {
            println!("cargo:warning=rustup not found; skipping wasm32 target check");
            return;
        }
    };
    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|l| l.trim() == "wasm32-unknown-unknown") {
        println!(
            "cargo:warning=wasm32-unknown-unknown target not installed; the dashboard only runs in the browser. Run `rustup target add wasm32-unknown-unknown`"
        );
    }
}
