//! Console and preset implementations of InputReader

use std::io::{self, BufRead, BufReader, Stdin};
use std::sync::Mutex;

use tracing::debug;

use parkit_domain::InputReader;
use parkit_types::{Error, Result};

/// Reads choices line by line, printing a prompt before each read
pub struct ConsoleInputReader<R> {
    reader: Mutex<R>,
    prompts: bool,
}

impl ConsoleInputReader<BufReader<Stdin>> {
    /// Reader on standard input; `prompts` prints the menu text before each read
    pub fn stdin(prompts: bool) -> Self {
        Self::new(BufReader::new(io::stdin()), prompts)
    }
}

impl<R: BufRead + Send> ConsoleInputReader<R> {
    pub fn new(reader: R, prompts: bool) -> Self {
        Self {
            reader: Mutex::new(reader),
            prompts,
        }
    }

    /// Read one trimmed line; end of input is an error
    pub fn read_line(&self) -> Result<String> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| Error::Persistence("input lock poisoned".to_string()))?;
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input").into());
        }
        Ok(line.trim().to_string())
    }

    fn prompt(&self, lines: &[&str]) {
        if self.prompts {
            for line in lines {
                println!("{}", line);
            }
        }
    }
}

impl<R: BufRead + Send> InputReader for ConsoleInputReader<R> {
    fn read_selection(&self) -> Result<u32> {
        self.prompt(&["Please select vehicle type from menu", "1 CAR", "2 BIKE"]);
        let line = self.read_line()?;
        line.parse::<u32>().map_err(|_| {
            debug!(input = %line, "unparsable vehicle type selection");
            Error::InvalidSelection(format!("'{}' is not a menu number", line))
        })
    }

    fn read_vehicle_registration_number(&self) -> Result<String> {
        self.prompt(&["Please type the vehicle registration number and press enter key"]);
        let line = self.read_line()?;
        if line.is_empty() {
            return Err(Error::InvalidSelection(
                "vehicle registration number is empty".to_string(),
            ));
        }
        Ok(line)
    }
}

/// Answers from values given up front, deferring to another reader for the rest
pub struct PresetInput<F> {
    selection: Option<u32>,
    vehicle_reg_number: Option<String>,
    fallback: F,
}

impl<F: InputReader> PresetInput<F> {
    pub fn new(selection: Option<u32>, vehicle_reg_number: Option<String>, fallback: F) -> Self {
        Self {
            selection,
            vehicle_reg_number,
            fallback,
        }
    }
}

impl<F: InputReader> InputReader for PresetInput<F> {
    fn read_selection(&self) -> Result<u32> {
        match self.selection {
            Some(code) => Ok(code),
            None => self.fallback.read_selection(),
        }
    }

    fn read_vehicle_registration_number(&self) -> Result<String> {
        match &self.vehicle_reg_number {
            Some(plate) => Ok(plate.trim().to_string()),
            None => self.fallback.read_vehicle_registration_number(),
        }
    }
}
