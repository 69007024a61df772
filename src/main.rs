mod audio;
mod error;
mod game;
mod models;
mod scheduler;
mod storage;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::audio::{CuePlayer, SoundBoard};
use crate::game::GameController;
use crate::storage::{ensure_config, load_config};
use crate::ui::{App, render};

/// 事件轮询间隔，同时决定延时动作的精度
const TICK: Duration = Duration::from_millis(30);

/// 获取应用目录 (如 ~/.config/pairflip/)，不存在则创建
fn app_dir(base: Option<PathBuf>) -> io::Result<PathBuf> {
    let dir = base
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户目录"))?
        .join("pairflip");

    fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// 日志写入文件，终端留给界面使用
fn init_logging(dir: &Path) -> io::Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("pairflip.log"))?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("PAIRFLIP_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn invalid_data<E>(e: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn main() -> io::Result<()> {
    init_logging(&app_dir(dirs::data_dir())?)?;

    // 配置文件路径 (~/.config/pairflip/config.toml)
    let config_path = app_dir(dirs::config_dir())?.join("config.toml");
    match ensure_config(&config_path) {
        Ok(true) => tracing::info!(path = %config_path.display(), "wrote default config"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "could not write default config"),
    }

    let config = load_config(&config_path).map_err(invalid_data)?;
    let catalog = config.catalog().map_err(invalid_data)?;
    let sounds = SoundBoard::new(&config.sounds);
    let game = GameController::new(catalog, &config.default_theme, config.timing, sounds)
        .map_err(invalid_data)?;
    tracing::info!(theme = %config.default_theme, "starting");

    // 创建应用状态
    let mut app = App::new(game);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

fn run_app<P: CuePlayer>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<P>,
) -> io::Result<()> {
    let clock = Instant::now();
    loop {
        app.tick(clock.elapsed());
        terminal.draw(|f| render(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if ui::handle_key_event(app, key.code)? {
                    break;
                }
            }
            Event::Mouse(mouse) => ui::handle_mouse_event(app, mouse),
            _ => {}
        }
    }
    Ok(())
}
