//! `create-disk` argument validation, from argv to bytes on the medium.

use clap::Parser;
use floppy_coffee::adapters::medium::BlockMedium;
use floppy_coffee::app::commands::AppCommand;
use floppy_coffee::app::ports::MediumPort;
use floppy_coffee::cli::Cli;
use floppy_coffee::codec::{BrewCommand, Command, ScheduleCommand, Variety};
use floppy_coffee::error::{Error, InvalidCommand};

fn parse(args: &[&str]) -> floppy_coffee::error::Result<AppCommand> {
    let argv = std::iter::once("floppy-coffee").chain(args.iter().copied());
    Cli::try_parse_from(argv)
        .expect("argv parses")
        .into_app_command()
}

#[test]
fn hour_24_is_rejected() {
    assert_eq!(
        parse(&["create-disk", "time", "24", "0"]),
        Err(Error::InvalidCommand(InvalidCommand::HourOutOfRange(24)))
    );
}

#[test]
fn minute_60_is_rejected() {
    assert_eq!(
        parse(&["create-disk", "time", "6", "60"]),
        Err(Error::InvalidCommand(InvalidCommand::MinuteOutOfRange(60)))
    );
}

#[test]
fn now_sentinels_are_accepted() {
    assert_eq!(
        parse(&["create-disk", "time", "-1", "-1"]),
        Ok(AppCommand::WriteDisk(Command::Schedule(ScheduleCommand::now())))
    );
}

#[test]
fn below_sentinel_is_rejected() {
    assert_eq!(
        parse(&["create-disk", "time", "-2", "0"]),
        Err(Error::InvalidCommand(InvalidCommand::HourOutOfRange(-2)))
    );
}

#[test]
fn three_espressos_is_rejected() {
    assert_eq!(
        parse(&["create-disk", "variety", "3", "espresso"]),
        Err(Error::InvalidCommand(InvalidCommand::QuantityOutOfRange(3)))
    );
}

#[test]
fn zero_cups_is_rejected() {
    assert_eq!(
        parse(&["create-disk", "variety", "0", "americano"]),
        Err(Error::InvalidCommand(InvalidCommand::QuantityOutOfRange(0)))
    );
}

#[test]
fn two_americanos_is_written_to_disk() {
    let AppCommand::WriteDisk(cmd) = parse(&["create-disk", "variety", "2", "americano"]).unwrap()
    else {
        panic!("expected a disk write");
    };
    assert_eq!(
        cmd,
        Command::Brew(BrewCommand::new(2, Variety::Americano).unwrap())
    );

    let disk = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(disk.path(), vec![0u8; 2048]).unwrap();
    let mut medium = BlockMedium::new(disk.path(), 1000, 50);
    medium.write_command(&cmd).unwrap();

    let raw = std::fs::read(disk.path()).unwrap();
    assert!(raw[1000..1150].chunks(3).all(|c| c == [1, 2, 3]));
    assert_eq!(medium.read_command().unwrap(), cmd);
}

#[test]
fn out_of_i8_range_is_a_usage_error() {
    let err = Cli::try_parse_from(["floppy-coffee", "create-disk", "time", "300", "0"]).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
