//! # Console Interface Module
//!
//! Interactive terminal view of the breadboard computer: registers, bus,
//! flags, output history and the program memory, stepped from the keyboard.
//!
//! ## Keys
//! - `s` / space: execute one instruction
//! - `r`: run or pause
//! - `b`: reboot (reset and fetch)
//! - `q` / Esc: quit

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::assembler::disassemble;
use crate::systems::{Computer, MachineState, PROGRAM_SIZE};
use crate::types::to_signed;

/// Console configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub refresh_rate_ms: u64,
    pub show_memory: bool,
    /// Memory rows of eight bytes each.
    pub memory_rows: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            show_memory: true,
            memory_rows: 2,
        }
    }
}

/// Console UI application state
pub struct ConsoleApp {
    computer: Computer,
    config: ConsoleConfig,
    running: bool,
    auto_run: bool,
    status: String,
}

impl ConsoleApp {
    pub fn new(computer: Computer, config: ConsoleConfig) -> Self {
        Self {
            computer,
            config,
            running: false,
            auto_run: false,
            status: "ready".to_string(),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.running = true;
        let refresh = Duration::from_millis(self.config.refresh_rate_ms);
        let mut last_step = Instant::now();

        let result = (|| -> Result<(), Box<dyn std::error::Error>> {
            while self.running {
                terminal.draw(|f| self.draw_ui(f))?;

                if event::poll(Duration::from_millis(10))? {
                    if let Event::Key(key) = event::read()? {
                        self.handle_key_event(key.code);
                    }
                }

                if self.auto_run && last_step.elapsed() >= refresh {
                    self.step();
                    last_step = Instant::now();
                }
            }
            Ok(())
        })();

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Hand the computer back, e.g. to print its final state.
    pub fn into_computer(self) -> Computer {
        self.computer
    }

    fn step(&mut self) {
        match self.computer.step() {
            Ok(true) => self.status = format!("stepped to PC={}", self.computer.pc()),
            Ok(false) => {
                self.auto_run = false;
                self.status = "halted".to_string();
            }
            Err(e) => {
                error!(error = %e, "simulation stopped");
                self.auto_run = false;
                self.status = format!("error: {}", e);
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char(' ') => {
                self.auto_run = false;
                self.step();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.auto_run = !self.auto_run && !self.computer.is_halted();
                self.status = if self.auto_run { "running" } else { "paused" }.to_string();
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                self.auto_run = false;
                self.status = match self.computer.boot() {
                    Ok(()) => {
                        info!("rebooted from console");
                        "rebooted".to_string()
                    }
                    Err(e) => format!("error: {}", e),
                };
            }
            _ => {}
        }
    }

    fn draw_ui(&self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Title bar
                Constraint::Min(8),    // Main content
                Constraint::Length(3), // Status bar
            ])
            .split(size);

        let title_text = vec![
            Line::from(vec![Span::styled(
                "Breadboard Computer Console",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![
                Span::raw("Keys: "),
                Span::styled("s/space", Style::default().fg(Color::Yellow)),
                Span::raw("=step, "),
                Span::styled("r", Style::default().fg(Color::Yellow)),
                Span::raw("=run/pause, "),
                Span::styled("b", Style::default().fg(Color::Yellow)),
                Span::raw("=reboot, "),
                Span::styled("q", Style::default().fg(Color::Yellow)),
                Span::raw("=quit"),
            ]),
        ];
        let title = Paragraph::new(title_text)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        f.render_widget(title, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        match self.computer.state() {
            Ok(state) => {
                self.draw_registers(f, content_chunks[0], &state);
                if self.config.show_memory {
                    self.draw_memory(f, content_chunks[1], &state);
                }
            }
            Err(e) => {
                let message = Paragraph::new(format!("state unavailable: {}", e))
                    .block(Block::default().borders(Borders::ALL).title("Machine"));
                f.render_widget(message, chunks[1]);
            }
        }

        let status_bar = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Message"));
        f.render_widget(status_bar, chunks[2]);
    }

    fn draw_registers(&self, f: &mut Frame, area: Rect, state: &MachineState) {
        let flag = |set: bool, name: &'static str| {
            let style = if set {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(name, style)
        };
        let alu = state
            .alu
            .map_or_else(|| "--".to_string(), |value| format!("{:3}", value));
        let outputs: Vec<String> = state.outputs.iter().map(|value| value.to_string()).collect();

        let lines = vec![
            Line::from(format!("PC   {:2}   MAR {:2}", state.pc, state.mar)),
            Line::from(format!("IR   {:08b}  {}", state.ir, disassemble(state.ir))),
            Line::from(format!("A    {:08b}  {:3} ({:+})", state.a, state.a, to_signed(state.a))),
            Line::from(format!("B    {:08b}  {:3} ({:+})", state.b, state.b, to_signed(state.b))),
            Line::from(format!("ALU  {}", alu)),
            Line::from(format!("BUS  {}", state.bus)),
            Line::from(vec![
                Span::raw("FLAGS "),
                flag(state.carry, "C"),
                Span::raw(" "),
                flag(state.zero, "Z"),
            ]),
            Line::from(format!("CTRL {}", state.control)),
            Line::from(""),
            Line::from(vec![Span::styled(
                format!("OUT  {}", state.output),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )]),
            Line::from(format!("     [{}]", outputs.join(", "))),
            Line::from(format!(
                "cycles {}  steps {}{}",
                state.cycles,
                state.steps,
                if state.halted { "  HALTED" } else { "" }
            )),
        ];

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Registers"))
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }

    fn draw_memory(&self, f: &mut Frame, area: Rect, state: &MachineState) {
        let rows = self.config.memory_rows.min(PROGRAM_SIZE / 8);
        let mut lines = Vec::new();

        for row in 0..rows {
            for address in row * 8..(row + 1) * 8 {
                let byte = state.memory.get(address).copied().unwrap_or(0);
                let marker = if address == state.pc as usize { ">" } else { " " };
                let style = if address == state.mar as usize {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{}{:2}: ", marker, address)),
                    Span::styled(format!("{:08b}  {}", byte, disassemble(byte)), style),
                ]));
            }
        }

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Memory"))
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }
}

/// Public interface for launching the console
pub fn run_console(
    computer: Computer,
    config: ConsoleConfig,
) -> Result<Computer, Box<dyn std::error::Error>> {
    let mut app = ConsoleApp::new(computer, config);
    app.run()?;
    Ok(app.into_computer())
}
