mod bots;
mod config;
mod events;
mod server;
mod tui;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::time::{MissedTickBehavior, interval};

use bots::BotSettings;
use config::ServerConfig;
use server::GameServer;
use tui::TuiState;

#[derive(Parser)]
#[command(name = "starfall-server")]
#[command(about = "Authoritative Starfall room server")]
struct Args {
    #[arg(long, help = "JSON room configuration; flags below override it")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    tick_rate: Option<u32>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    #[arg(short, long)]
    max_clients: Option<usize>,

    #[arg(short, long, default_value_t = 8, help = "Simulated clients to connect")]
    bots: usize,

    #[arg(long, default_value_t = 60, help = "Intents per second per simulated client")]
    bot_input_rate: u32,

    #[arg(long, default_value_t = 0.02, help = "Reconnect chance per second per simulated client")]
    bot_churn: f64,

    #[arg(long, help = "Seed for reproducible spawns and cosmetics")]
    seed: Option<u64>,

    #[arg(long, help = "Stop after this many seconds")]
    duration_secs: Option<u64>,

    #[arg(long)]
    headless: bool,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig> {
        let mut room = match &self.config {
            Some(path) => config::load_room_config(path)?,
            None => Default::default(),
        };
        if let Some(tick_rate) = self.tick_rate {
            room.tick_rate = tick_rate;
        }
        if let Some(width) = self.width {
            room.world_width = width;
        }
        if let Some(height) = self.height {
            room.world_height = height;
        }
        if let Some(max_clients) = self.max_clients {
            room.max_agents = max_clients;
        }
        room.validate()?;

        if !(self.bot_churn.is_finite() && (0.0..=1.0).contains(&self.bot_churn)) {
            bail!("bot churn must be within 0..=1, got {}", self.bot_churn);
        }

        Ok(ServerConfig {
            room,
            seed: self.seed,
            bots: self.bots,
            bot_input_rate: self.bot_input_rate,
            bot_churn: self.bot_churn,
            duration: self.duration_secs.map(Duration::from_secs),
            ..Default::default()
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let headless = args.headless;
    let config = args.into_config()?;

    if headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut server = GameServer::new(config)?;
    let bots = spawn_bots(&server);

    let result = if headless {
        log::info!(
            "Room running at {} Hz with {} simulated clients",
            server.config().room.tick_rate,
            server.config().bots
        );
        let result = server.run().await;
        log::info!("Server shutting down");
        result.map_err(Into::into)
    } else {
        run_with_tui(&mut server).await
    };

    server.running().store(false, Ordering::SeqCst);
    for bot in bots {
        bot.abort();
    }

    if let Err(e) = &result {
        log::error!("Server stopped: {}", e);
    }
    result
}

fn spawn_bots(server: &GameServer) -> Vec<tokio::task::JoinHandle<()>> {
    let config = server.config();
    bots::spawn_bots(
        config.bots,
        BotSettings {
            input_rate: config.bot_input_rate,
            churn_per_sec: config.bot_churn,
        },
        config.seed,
        server.sender(),
        server.running(),
    )
}

async fn run_with_tui(server: &mut GameServer) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = tui_loop(server, &mut terminal).await;

    server.shutdown();
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    result
}

async fn tui_loop(
    server: &mut GameServer,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let running = server.running();
    let mut tui_state = TuiState::new();
    let mut ticker = interval(server.config().room.fixed_step());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = server
        .config()
        .duration
        .map(|d| tokio::time::Instant::now() + d);

    tui_state.log_info(format!(
        "Room started with {} simulated clients",
        server.config().bots
    ));

    while running.load(Ordering::SeqCst) {
        ticker.tick().await;

        let tick_result = server.tick_once();
        for event in server.drain_events() {
            tui_state.log(event.severity(), event.describe());
        }
        tick_result?;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        running.store(false, Ordering::SeqCst);
                    }
                    KeyCode::PageUp => tui_state.scroll_up(),
                    KeyCode::PageDown => tui_state.scroll_down(),
                    KeyCode::End => tui_state.scroll_to_bottom(),
                    _ => {}
                }
            }
        }

        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
            running.store(false, Ordering::SeqCst);
        }

        let stats = server.stats();
        let leaderboard = server.leaderboard();
        terminal.draw(|frame| {
            tui::render(frame, &tui_state, &stats, &leaderboard);
        })?;
    }

    Ok(())
}
