mod shell;

use std::path::PathBuf;

use engine_logging::{engine_info, LogDestination};

fn main() -> anyhow::Result<()> {
    engine_logging::initialize(LogDestination::File);
    engine_info!(
        "prompter session started at {}",
        chrono::Utc::now().to_rfc3339()
    );

    let script = std::env::args().nth(1).map(PathBuf::from);
    shell::run(script)
}
