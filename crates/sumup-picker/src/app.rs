//! Terminal runtime and event loop

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::warn;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crate::engine::{Effect, PickerConfig, PickerEngine, PickerEvent, PickerOutcome};
use crate::record::{ItemSource, MembershipRecord};
use crate::timer::DebounceTimers;
use crate::ui;
use crate::worker::FetchWorker;

/// Owns the engine and carries out the effects it asks for
struct Runtime {
    engine: PickerEngine,
    worker: FetchWorker,
    timers: DebounceTimers,
}

impl Runtime {
    fn dispatch(&mut self, event: PickerEvent) {
        for effect in self.engine.handle(event) {
            match effect {
                Effect::Fetch(request) => self.worker.submit(request),
                Effect::ArmDebounce { ticket, delay } => self.timers.arm(ticket, delay),
            }
        }
    }

    /// Feed everything that happened since the last frame into the engine
    fn pump(&mut self) -> Result<()> {
        // Drain all pending terminal events first (lowest latency for input)
        let mut events_processed = 0usize;
        while events_processed < 100 && event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                self.dispatch(PickerEvent::Key(key));
            }
            events_processed += 1;
            if self.engine.is_finished() {
                return Ok(());
            }
        }

        while let Some(response) = self.worker.try_recv() {
            self.dispatch(PickerEvent::FetchCompleted(response));
        }

        for ticket in self.timers.due(Instant::now()) {
            self.dispatch(PickerEvent::DebounceFired(ticket));
        }
        Ok(())
    }
}

/// Run the interactive picker over an already fetched root listing
pub fn run<S: ItemSource>(source: S, root_items: Vec<MembershipRecord>) -> Result<PickerOutcome> {
    run_with_config(source, root_items, PickerConfig::default())
}

pub fn run_with_config<S: ItemSource>(
    source: S,
    root_items: Vec<MembershipRecord>,
    config: PickerConfig,
) -> Result<PickerOutcome> {
    let mut runtime = Runtime {
        engine: PickerEngine::with_config(root_items, config),
        worker: FetchWorker::spawn(source),
        timers: DebounceTimers::new(),
    };

    enable_raw_mode()?;
    let mut terminal = match enter_terminal() {
        Ok(terminal) => terminal,
        Err(err) => {
            restore_terminal();
            return Err(err);
        }
    };

    let result = run_loop(&mut terminal, &mut runtime);

    restore_terminal();
    terminal.show_cursor()?;

    result?;
    Ok(runtime
        .engine
        .into_outcome()
        .unwrap_or(PickerOutcome::Cancelled))
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Leave raw mode and the alternate screen. Each step runs even if the other fails.
fn restore_terminal() {
    if let Err(err) = disable_raw_mode() {
        warn!("failed to disable raw mode: {}", err);
    }
    if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!("failed to leave alternate screen: {}", err);
    }
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    runtime: &mut Runtime,
) -> Result<()> {
    // ~60Hz is plenty for a list picker
    const FRAME_TIME: Duration = Duration::from_millis(16);

    loop {
        let frame_start = Instant::now();

        runtime.pump()?;
        if runtime.engine.is_finished() {
            break;
        }

        terminal.draw(|f| ui::render(f, &runtime.engine))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - elapsed);
        }
    }

    Ok(())
}
