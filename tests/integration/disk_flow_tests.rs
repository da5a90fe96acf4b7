//! End-to-end disk flows over real file adapters.
//!
//! The medium and the state file are tempfiles driven through
//! `BlockMedium` and `CommandStore`; only the relays, cron, and clock are
//! mocked.

use floppy_coffee::adapters::command_store::CommandStore;
use floppy_coffee::adapters::medium::BlockMedium;
use floppy_coffee::app::events::AppEvent;
use floppy_coffee::app::ports::MediumPort;
use floppy_coffee::app::service::{BrewController, HandleOutcome};
use floppy_coffee::codec::{self, BrewCommand, Command, ScheduleCommand, Variety};
use floppy_coffee::error::Error;
use floppy_coffee::monitor::{MediumMonitor, PresenceEdge};
use floppy_coffee::scheduler::DailyTime;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

use super::mock_hw::{
    FixedClock, InstantTimer, MockOutputs, MockScheduler, RecordingSink, sequencer,
};

const OFFSET: u64 = 1000;
const COPIES: usize = 100;

struct Rig {
    _dir: TempDir,
    disk: std::path::PathBuf,
    state: NamedTempFile,
}

impl Rig {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("fd0");
        std::fs::write(&disk, vec![0u8; 4096]).unwrap();
        let state = NamedTempFile::new().unwrap();
        std::fs::write(state.path(), [0u8; 4]).unwrap();
        Self {
            _dir: dir,
            disk,
            state,
        }
    }

    fn medium(&self) -> BlockMedium {
        BlockMedium::new(&self.disk, OFFSET, COPIES)
    }

    fn controller(
        &self,
    ) -> BrewController<BlockMedium, CommandStore, MockScheduler, MockOutputs, InstantTimer, FixedClock>
    {
        BrewController::new(
            self.medium(),
            CommandStore::new(self.state.path()),
            MockScheduler::default(),
            sequencer(InstantTimer::default()),
            FixedClock::at(12, 0),
        )
    }

    fn write(&self, cmd: Command) {
        self.medium().write_command(&cmd).unwrap();
    }

    fn state_bytes(&self) -> Vec<u8> {
        std::fs::read(self.state.path()).unwrap()
    }
}

#[test]
fn schedule_brew_then_now_disk() {
    let rig = Rig::new();
    let mut c = rig.controller();
    let mut sink = RecordingSink::default();

    rig.write(Command::Schedule(ScheduleCommand::new(7, 30).unwrap()));
    assert_eq!(
        c.handle_edge(PresenceEdge::Inserted, &mut sink),
        HandleOutcome::Scheduled(DailyTime { hour: 7, minute: 30 })
    );
    assert_eq!(rig.state_bytes(), vec![7, 30, 0, 0]);

    let brew = BrewCommand::new(2, Variety::Americano).unwrap();
    rig.write(Command::Brew(brew));
    assert_eq!(
        c.handle_edge(PresenceEdge::Inserted, &mut sink),
        HandleOutcome::Stored(brew)
    );
    assert_eq!(rig.state_bytes(), vec![7, 30, 2, 3]);

    rig.write(Command::Schedule(ScheduleCommand::now()));
    let HandleOutcome::Brewed(report) = c.handle_edge(PresenceEdge::Inserted, &mut sink) else {
        panic!("now disk should brew");
    };
    assert_eq!(report.command, brew);
    assert_eq!(report.dispense, Duration::from_secs(80));
    // The now disk never overwrites the saved schedule.
    assert_eq!(rig.state_bytes(), vec![7, 30, 2, 3]);
    assert_eq!(
        c.scheduler().installed,
        vec![DailyTime { hour: 7, minute: 30 }]
    );
}

#[test]
fn noisy_disk_still_decodes() {
    let rig = Rig::new();
    let brew = BrewCommand::new(1, Variety::Espresso).unwrap();
    let mut block = codec::repeat(Command::Brew(brew).encode(), COPIES);
    // One corrupted byte in each of the first 30 copies, rotating position.
    for i in (0..block.len()).step_by(3).take(COPIES * 3 / 10) {
        block[i + (i / 3) % 3] = 0xA5;
    }
    let mut raw = std::fs::read(&rig.disk).unwrap();
    raw[OFFSET as usize..OFFSET as usize + block.len()].copy_from_slice(&block);
    std::fs::write(&rig.disk, raw).unwrap();

    assert_eq!(rig.medium().read_command().unwrap(), Command::Brew(brew));
}

#[test]
fn missing_state_file_fails_save_but_controller_survives() {
    let dir = tempfile::tempdir().unwrap();
    let disk = dir.path().join("fd0");
    std::fs::write(&disk, vec![0u8; 4096]).unwrap();
    let medium = BlockMedium::new(&disk, OFFSET, COPIES);
    medium
        .write_redundant(Command::Schedule(ScheduleCommand::new(5, 0).unwrap()).encode())
        .unwrap();

    let mut c = BrewController::new(
        medium,
        CommandStore::new(dir.path().join("missing-state")),
        MockScheduler::default(),
        sequencer(InstantTimer::default()),
        FixedClock::at(0, 0),
    );
    let mut sink = RecordingSink::default();
    assert_eq!(
        c.handle_edge(PresenceEdge::Inserted, &mut sink),
        HandleOutcome::Failed(Error::StateUnavailable)
    );
    assert!(c.scheduler().installed.is_empty());
    assert_eq!(
        sink.events,
        vec![
            AppEvent::MediumInserted,
            AppEvent::Rejected(Error::StateUnavailable),
        ]
    );
    c.sequencer().with_outputs(|o| assert_eq!(o.beeps(), 0));
}

#[test]
fn monitor_sees_device_node_come_and_go() {
    let dir = tempfile::tempdir().unwrap();
    let disk = dir.path().join("fd0");
    let mut monitor = MediumMonitor::new(BlockMedium::new(&disk, OFFSET, COPIES), 1);
    assert_eq!(monitor.boot_edge(), None);

    std::fs::write(&disk, [0u8; 16]).unwrap();
    assert_eq!(monitor.on_tick(), Some(PresenceEdge::Inserted));
    assert_eq!(monitor.on_tick(), None);

    std::fs::remove_file(&disk).unwrap();
    assert_eq!(monitor.on_tick(), Some(PresenceEdge::Removed));
}
