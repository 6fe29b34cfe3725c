//! Serve command - run the demo API server.

use colored::Colorize;

use crate::server::{app, state::AppState};

pub fn run(port: u16, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new()?.with_verbose(verbose);

    let url = format!("http://localhost:{}", port);
    println!();
    println!("{} {}", "Starting demo API at".cyan().bold(), url.white().bold());
    println!();
    for route in ["/api/order", "/api/product", "/api/slim-user", "/api/dashboard"] {
        println!("  GET  {}", route);
    }
    println!("  POST /api/map");
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))?;

    println!("{}", "Shutting down...".yellow());
    Ok(())
}
