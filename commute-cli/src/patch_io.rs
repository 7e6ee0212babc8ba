//! Input arguments for the commute CLI.

use clio::Input;
use commute_core::{Named, Prim, RL, SerialPatchSequence};
use std::io::{BufReader, Read};

use crate::CliError;

/// Arguments for reading a patch history.
#[derive(Debug, clap::Args)]
pub struct PatchInputArgs {
    /// Input file. Defaults to `-` for stdin.
    #[arg(value_parser, default_value = "-", help_heading = "Input")]
    pub input: Input,
}

impl PatchInputArgs {
    /// Read a serialized history from the input.
    ///
    /// # Errors
    ///
    /// If the input cannot be read or parsed, or does not describe a valid
    /// history.
    pub fn get_sequence(&mut self) -> Result<RL<Named<Prim>>, CliError> {
        read_sequence(BufReader::new(&mut self.input))
    }

    /// Read a serialized history from a generic reader.
    ///
    /// This method allows reading from any source implementing `Read`, such as
    /// in-memory buffers or byte slices.
    pub fn get_sequence_from_reader<R: Read>(&self, reader: R) -> Result<RL<Named<Prim>>, CliError> {
        read_sequence(BufReader::new(reader))
    }
}

fn read_sequence(reader: impl Read) -> Result<RL<Named<Prim>>, CliError> {
    let serial: SerialPatchSequence = serde_json::from_reader(reader)?;
    Ok(serial.to_sequence()?)
}
