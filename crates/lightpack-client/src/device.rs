//! Device operations
//!
//! Thin wrappers over [`Session::execute`]. Getters run without the lock;
//! every setter runs inside [`Session::with_lock`].

use lightpack_core::records::split_list;
use lightpack_core::{
    parse_records, verbs, ApiStatus, Attribute, Command, Error, LedArea, Mode, Record,
    Response, Rgb, ScreenRect, Status,
};
use std::fmt::Display;

use crate::error::{ClientError, Result};
use crate::session::Session;

impl Session {
    async fn query(&mut self, verb: &'static str) -> Result<String> {
        let response = self.execute(&Command::new(verb)).await?;
        Ok(response.into_payload()?)
    }

    /// Run one command under the lock and require an acknowledgement
    async fn apply(&mut self, command: Command) -> Result<()> {
        let response = self
            .with_lock(move |s| Box::pin(async move { s.execute(&command).await }))
            .await?;
        expect_ok(response)
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub async fn status(&mut self) -> Result<Status> {
        Ok(Status::parse(&self.query(verbs::GET_STATUS).await?))
    }

    pub async fn is_on(&mut self) -> Result<bool> {
        Ok(self.status().await? == Status::On)
    }

    /// Whether some client currently holds the lock
    pub async fn api_status(&mut self) -> Result<ApiStatus> {
        Ok(ApiStatus::parse(&self.query(verbs::GET_API_STATUS).await?))
    }

    pub async fn profiles(&mut self) -> Result<Vec<String>> {
        let payload = self.query(verbs::GET_PROFILES).await?;
        Ok(split_list(&payload).map(str::to_string).collect())
    }

    pub async fn profile(&mut self) -> Result<String> {
        self.query(verbs::GET_PROFILE).await
    }

    pub async fn led_count(&mut self) -> Result<usize> {
        let payload = self.query(verbs::GET_LED_COUNT).await?;
        payload
            .trim()
            .parse()
            .map_err(|_| malformed(format!("led count {:?}", payload)))
    }

    /// Capture area of every LED, in LED order
    pub async fn led_areas(&mut self) -> Result<Vec<LedArea>> {
        let payload = self.query(verbs::GET_LEDS).await?;
        Ok(parse_records(&payload)?
            .iter()
            .map(LedArea::from_record)
            .collect::<lightpack_core::Result<Vec<_>>>()?)
    }

    /// Current colour of every LED, in LED order
    pub async fn colors(&mut self) -> Result<Vec<Rgb>> {
        let payload = self.query(verbs::GET_COLORS).await?;
        Ok(parse_records(&payload)?
            .iter()
            .map(Rgb::from_record)
            .collect::<lightpack_core::Result<Vec<_>>>()?)
    }

    pub async fn fps(&mut self) -> Result<f64> {
        let payload = self.query(verbs::GET_FPS).await?;
        payload
            .trim()
            .parse()
            .map_err(|_| malformed(format!("fps {:?}", payload)))
    }

    pub async fn screen_size(&mut self) -> Result<ScreenRect> {
        Ok(self.query(verbs::GET_SCREEN_SIZE).await?.parse::<ScreenRect>()?)
    }

    pub async fn mode(&mut self) -> Result<Mode> {
        Ok(Mode::parse(&self.query(verbs::GET_MODE).await?))
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    pub async fn turn_on(&mut self) -> Result<()> {
        self.set_power(true).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.set_power(false).await
    }

    pub async fn set_power(&mut self, on: bool) -> Result<()> {
        self.apply(Command::with_arg(verbs::SET_STATUS, Status::as_arg(on)))
            .await
    }

    /// Set one of the scalar attributes, e.g. `setgamma:2.0`
    pub async fn set_attribute(&mut self, attribute: Attribute, value: impl Display) -> Result<()> {
        self.apply(Command::with_arg(attribute.verb(), value)).await
    }

    pub async fn set_mode(&mut self, mode: &Mode) -> Result<()> {
        self.set_attribute(Attribute::Mode, mode).await
    }

    pub async fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        self.set_attribute(Attribute::Gamma, gamma).await
    }

    pub async fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        self.set_attribute(Attribute::Brightness, brightness).await
    }

    pub async fn set_smooth(&mut self, smooth: u8) -> Result<()> {
        self.set_attribute(Attribute::Smooth, smooth).await
    }

    pub async fn set_profile(&mut self, name: &str) -> Result<()> {
        self.set_attribute(Attribute::Profile, name).await
    }

    /// Set the colour of one LED (zero-based index)
    pub async fn set_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        self.apply(Command::batch(verbs::SET_COLOR, [color.to_record(index)]))
            .await
    }

    /// Set LEDs `0..colors.len()` in one batched command
    pub async fn set_colors(&mut self, colors: &[Rgb]) -> Result<()> {
        let records: Vec<Record> = colors
            .iter()
            .enumerate()
            .map(|(i, c)| c.to_record(i))
            .collect();
        self.apply(Command::batch(verbs::SET_COLOR, records)).await
    }

    /// Set every LED to the same colour
    pub async fn set_all_colors(&mut self, color: Rgb) -> Result<()> {
        let response = self
            .with_lock(move |s| {
                Box::pin(async move {
                    let count = s.led_count().await?;
                    let command =
                        Command::batch(verbs::SET_COLOR, (0..count).map(|i| color.to_record(i)));
                    s.execute(&command).await
                })
            })
            .await?;
        expect_ok(response)
    }

    /// Set the capture area of one LED (zero-based index)
    pub async fn set_led_area(&mut self, index: usize, area: LedArea) -> Result<()> {
        self.apply(Command::batch(verbs::SET_LEDS, [area.to_record(index)]))
            .await
    }

    pub async fn add_profile(&mut self, name: &str) -> Result<()> {
        self.apply(Command::with_arg(verbs::NEW_PROFILE, name)).await
    }

    pub async fn delete_profile(&mut self, name: &str) -> Result<()> {
        self.apply(Command::with_arg(verbs::DELETE_PROFILE, name))
            .await
    }
}

fn expect_ok(response: Response) -> Result<()> {
    if response.is_acknowledgement() {
        Ok(())
    } else {
        Err(ClientError::Protocol(Error::UnexpectedResponse(
            response.to_string(),
        )))
    }
}

fn malformed(msg: String) -> ClientError {
    ClientError::Protocol(Error::MalformedPayload(msg))
}
