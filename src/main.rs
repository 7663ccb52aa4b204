use clap::Parser;
use color_eyre::Result;
use gridview::{App, AppConfig, AppEvent, Args, ConfigManager, GridState, Theme};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: &AppConfig) -> Result<()> {
    let dataset = gridview::load_dataset(args, config)?;
    let screen = gridview::screen_name(args);
    info!(screen = %screen, rows = dataset.len(), columns = dataset.columns().len(), "opened dataset");

    let persistence = gridview::open_persistence(config, &screen);
    let grid = GridState::new(dataset, persistence, config.grid_options(args.reset_view));
    let theme = Theme::from_config(&config.theme)?;

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new(tx.clone(), grid, theme, config);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        // Placeholders drawn while scrolling are replaced once scrolling settles.
        if updated || app.needs_redraw() {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args, config: &AppConfig) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(gridview::APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.clear_state {
        let screen = gridview::screen_name(args);
        match gridview::state_store(config) {
            Ok(store) => {
                let persistence = gridview::ViewPersistence::new(store, screen.clone());
                if let Err(e) = persistence.clear() {
                    eprintln!("Error clearing view state: {}", e);
                    std::process::exit(1);
                }
                println!("Cleared view state for '{}'", screen);
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No view state to clear");
                return Ok(Some(()));
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(gridview::APP_NAME)?;
    gridview::apply_args(&mut config, &args);
    config.validate()?;

    if let Some(()) = handle_early_exit_flags(&args, &config)? {
        return Ok(());
    }

    if let Some(settings) = gridview::logging::log_settings(
        gridview::APP_NAME,
        &config.logging,
        args.log_file.as_deref(),
        args.debug,
    ) {
        gridview::logging::init(&settings)?;
    }

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args, &config);
    ratatui::restore();
    if let Err(e) = result {
        error!(error = %e, "exiting with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
