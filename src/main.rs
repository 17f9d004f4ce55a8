mod app;
mod audio;
mod config;
mod library;
mod metadata;
mod picker;
mod queue;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
