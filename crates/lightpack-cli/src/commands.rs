//! Subcommand execution
//!
//! [`run`] talks to the controller and returns an [`Output`]; printing
//! happens after the session is closed.

use anyhow::Context;
use colored::Colorize;
use lightpack_client::{ClientError, LedArea, Response, Result, Rgb, Session, Status};
use lightpack_core::Command;
use serde::Serialize;

use crate::Commands;

/// What a subcommand produced
#[derive(Debug, PartialEq)]
pub enum Output {
    /// A change was applied
    Done(String),
    /// Plain lines
    Lines(Vec<String>),
    Areas { areas: Vec<LedArea>, json: bool },
    Colors { colors: Vec<Rgb>, json: bool },
    /// A raw command was rejected by the controller
    Rejected(String),
}

impl Output {
    pub fn print(&self) -> anyhow::Result<()> {
        match self {
            Output::Done(message) => println!("{} {}", "OK".green().bold(), message),
            Output::Lines(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Output::Areas { areas, json: true } => print_json(areas)?,
            Output::Areas { areas, json: false } => {
                for (i, area) in areas.iter().enumerate() {
                    println!(
                        "{:>4}  {}x{} at {},{}",
                        i, area.width, area.height, area.x, area.y
                    );
                }
            }
            Output::Colors { colors, json: true } => print_json(colors)?,
            Output::Colors { colors, json: false } => {
                for (i, c) in colors.iter().enumerate() {
                    println!(
                        "{:>4}  {}  {:>3},{:>3},{:>3}",
                        i,
                        "  ".on_truecolor(c.r, c.g, c.b),
                        c.r,
                        c.g,
                        c.b
                    );
                }
            }
            Output::Rejected(reason) => println!("{} {}", "REJECTED".red().bold(), reason),
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    println!("{}", text);
    Ok(())
}

/// Run one subcommand on a connected session
pub async fn run(session: &mut Session, command: Commands) -> Result<Output> {
    let output = match command {
        Commands::Status => {
            let status = session.status().await?;
            let api = session.api_status().await?;
            let mode = session.mode().await?;
            let profile = session.profile().await?;

            Output::Lines(vec![
                format!("Status:     {}", paint_status(&status)),
                format!("API:        {}", api),
                format!("Mode:       {}", mode),
                format!("Profile:    {}", profile.yellow()),
            ])
        }

        Commands::On => {
            session.turn_on().await?;
            Output::Done("Backlight on".into())
        }

        Commands::Off => {
            session.turn_off().await?;
            Output::Done("Backlight off".into())
        }

        Commands::Profiles => {
            let current = session.profile().await?;
            let lines = session
                .profiles()
                .await?
                .into_iter()
                .map(|name| {
                    if name == current {
                        format!("* {}", name.green().bold())
                    } else {
                        format!("  {}", name)
                    }
                })
                .collect();
            Output::Lines(lines)
        }

        Commands::Profile { name: None } => Output::Lines(vec![session.profile().await?]),

        Commands::Profile { name: Some(name) } => {
            session.set_profile(&name).await?;
            Output::Done(format!("Profile {}", name))
        }

        Commands::NewProfile { name } => {
            session.add_profile(&name).await?;
            Output::Done(format!("Created profile {}", name))
        }

        Commands::DeleteProfile { name } => {
            session.delete_profile(&name).await?;
            Output::Done(format!("Deleted profile {}", name))
        }

        Commands::Leds { json } => Output::Areas {
            areas: session.led_areas().await?,
            json,
        },

        Commands::Colors { json } => Output::Colors {
            colors: session.colors().await?,
            json,
        },

        Commands::Fps => Output::Lines(vec![format!("{:.2}", session.fps().await?)]),

        Commands::Screen => {
            let screen = session.screen_size().await?;
            Output::Lines(vec![format!(
                "{}x{} at {},{}",
                screen.width, screen.height, screen.x, screen.y
            )])
        }

        Commands::Mode { mode: None } => Output::Lines(vec![session.mode().await?.to_string()]),

        Commands::Mode { mode: Some(mode) } => {
            session.set_mode(&mode).await?;
            Output::Done(format!("Mode {}", mode))
        }

        Commands::Gamma { value } => {
            session.set_gamma(value).await?;
            Output::Done(format!("Gamma {}", value))
        }

        Commands::Brightness { value } => {
            session.set_brightness(value).await?;
            Output::Done(format!("Brightness {}", value))
        }

        Commands::Smooth { value } => {
            session.set_smooth(value).await?;
            Output::Done(format!("Smooth {}", value))
        }

        Commands::Color { index, r, g, b } => {
            session.set_color(index, Rgb::new(r, g, b)).await?;
            Output::Done(format!("LED {} set to {},{},{}", index, r, g, b))
        }

        Commands::All { r, g, b } => {
            session.set_all_colors(Rgb::new(r, g, b)).await?;
            Output::Done(format!("All LEDs set to {},{},{}", r, g, b))
        }

        Commands::Area {
            index,
            x,
            y,
            width,
            height,
        } => {
            session
                .set_led_area(index, LedArea::new(x, y, width, height))
                .await?;
            Output::Done(format!(
                "LED {} captures {}x{} at {},{}",
                index, width, height, x, y
            ))
        }

        Commands::Raw { command, lock } => {
            let command = Command::parse(&command)?;
            let response = if lock {
                session
                    .with_lock(move |s| Box::pin(async move { s.execute(&command).await }))
                    .await
            } else {
                session.execute(&command).await
            };
            raw_output(response)?
        }
    };

    Ok(output)
}

fn paint_status(status: &Status) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        Status::On => text.green(),
        Status::Off => text.yellow(),
        Status::DeviceError => text.red().bold(),
        Status::Unknown(_) => text.normal(),
    }
}

/// Controller rejections are reported, not treated as failures
fn raw_output(response: Result<Response>) -> Result<Output> {
    match response {
        Ok(Response::Success) => Ok(Output::Lines(vec!["ok".into()])),
        Ok(Response::Value(value)) => Ok(Output::Lines(vec![value])),
        Ok(Response::Symbol(symbol)) => Ok(Output::Lines(vec![symbol])),
        Err(ClientError::Protocol(e)) if e.is_rejection() => Ok(Output::Rejected(e.to_string())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpack_client::SessionConfig;
    use lightpack_test_utils::{ControllerModel, MockController};

    async fn exec(mock: &MockController, command: Commands) -> Result<Output> {
        let config = SessionConfig::new(mock.host(), mock.port());
        Session::open(config, move |s| Box::pin(run(s, command))).await
    }

    #[tokio::test]
    async fn test_all_sets_every_led() {
        let mock = MockController::with_model(ControllerModel::with_leds(2)).await;

        let output = exec(&mock, Commands::All { r: 9, g: 8, b: 7 }).await.unwrap();

        assert_eq!(output, Output::Done("All LEDs set to 9,8,7".into()));
        assert_eq!(mock.model().colors, vec![Rgb::new(9, 8, 7); 2]);
        assert_eq!(mock.model().lock_holder, None);
    }

    #[tokio::test]
    async fn test_leds_returns_areas() {
        let mock = MockController::with_model(ControllerModel::with_leds(2)).await;

        let output = exec(&mock, Commands::Leds { json: true }).await.unwrap();

        assert_eq!(
            output,
            Output::Areas {
                areas: vec![LedArea::new(0, 0, 100, 50), LedArea::new(100, 0, 100, 50)],
                json: true
            }
        );
    }

    #[tokio::test]
    async fn test_raw_reports_rejection() {
        let mock = MockController::start().await;

        let output = exec(
            &mock,
            Commands::Raw {
                command: "setstatus:off".into(),
                lock: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(output, Output::Rejected("not locked".into()));
        assert_eq!(mock.model().status, "on");
    }

    #[tokio::test]
    async fn test_raw_with_lock() {
        let mock = MockController::start().await;

        let output = exec(
            &mock,
            Commands::Raw {
                command: "setstatus:off".into(),
                lock: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(output, Output::Lines(vec!["ok".into()]));
        assert_eq!(mock.received(), vec!["lock", "setstatus:off", "unlock"]);
    }

    #[tokio::test]
    async fn test_profile_switch_error_propagates() {
        let mock = MockController::start().await;

        let result = exec(&mock, Commands::Profile { name: Some("Missing".into()) }).await;

        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }
}
