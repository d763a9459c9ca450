use anyhow::Context;
use lsh::Interpreter;
use lsh::config::Options;
use lsh::io_adapters::{EditorSource, StreamSource};
use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();
    init_tracing(&options.log);

    let mut interpreter = Interpreter::new(options.prompt.as_str());
    let mut out = io::stdout();
    let mut err = io::stderr();

    if options.use_editor(io::stdin().is_terminal()) {
        let mut source = EditorSource::new().context("failed to start the line editor")?;
        interpreter
            .repl(&mut source, &mut out, &mut err)
            .context("interpreter stopped")?;
    } else {
        let mut source = StreamSource::new(io::stdin().lock(), io::stdout());
        interpreter
            .repl(&mut source, &mut out, &mut err)
            .context("interpreter stopped")?;
    }

    Ok(())
}

// RUST_LOG wins over --log.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}
