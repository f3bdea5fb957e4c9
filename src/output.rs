//! CSV persistence of run results.
//!
//! Step snapshots are converted to owned records on the solver thread and
//! written by a background thread. The queue between them is bounded, so a
//! slow disk throttles the time march instead of piling up wake copies.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use polars::prelude::*;
use tracing::{debug, warn};

use tombo_calc::{
    Filament, ForceHistory, Loads, PerHalf, StepObserver, StepSnapshot, Vec3, WingHalf,
};

/// Snapshots allowed to wait for the writer before the time march blocks.
const SNAPSHOT_QUEUE: usize = 4;

/// One half of a step, detached from the solver's borrows.
struct HalfRecord {
    gamma: Vec<f64>,
    collocation: Vec<Vec3>,
    normals: Vec<Vec3>,
    wake: Vec<Filament>,
}

struct StepRecord {
    step: usize,
    time: f64,
    halves: PerHalf<HalfRecord>,
}

impl StepRecord {
    fn capture(snapshot: &StepSnapshot<'_>) -> Self {
        Self {
            step: snapshot.step,
            time: snapshot.time,
            halves: snapshot.halves.map(|_, half| HalfRecord {
                gamma: half.gamma.to_vec(),
                collocation: half.surface.collocation.clone(),
                normals: half.surface.normals.clone(),
                wake: half.wake.filaments().to_vec(),
            }),
        }
    }
}

/// Writes `gamma/step_NNNNN.csv` and `wake/step_NNNNN.csv` for every step.
pub struct SnapshotWriter {
    sender: Option<SyncSender<StepRecord>>,
    handle: Option<JoinHandle<Result<usize>>>,
}

impl SnapshotWriter {
    /// Creates the snapshot folders under `folder` and starts the writer thread.
    pub fn spawn(folder: &Path) -> Result<Self> {
        let gamma_dir = folder.join("gamma");
        let wake_dir = folder.join("wake");
        fs::create_dir_all(&gamma_dir)
            .with_context(|| format!("creating {}", gamma_dir.display()))?;
        fs::create_dir_all(&wake_dir).with_context(|| format!("creating {}", wake_dir.display()))?;

        let (sender, receiver) = mpsc::sync_channel::<StepRecord>(SNAPSHOT_QUEUE);
        let handle = thread::spawn(move || -> Result<usize> {
            let mut written = 0;
            for record in receiver {
                let name = format!("step_{:05}.csv", record.step);
                write_csv(&gamma_dir.join(&name), &mut panel_frame(&record)?)?;
                write_csv(&wake_dir.join(&name), &mut wake_frame(&record)?)?;
                debug!(step = record.step, "snapshot written");
                written += 1;
            }
            Ok(written)
        });

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Waits for pending snapshots and returns how many were written.
    pub fn finish(mut self) -> Result<usize> {
        drop(self.sender.take());
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("snapshot writer thread panicked"))?,
            None => Ok(0),
        }
    }
}

impl StepObserver for SnapshotWriter {
    fn on_step(&mut self, snapshot: &StepSnapshot<'_>) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(StepRecord::capture(snapshot)).is_err() {
            // the thread stopped on an error; finish() reports it
            warn!(step = snapshot.step, "snapshot writer stopped, dropping snapshots");
            self.sender = None;
        }
    }
}

fn write_csv(path: &Path, frame: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Bound circulation with collocation points and normals, one row per panel.
fn panel_frame(record: &StepRecord) -> PolarsResult<DataFrame> {
    let mut half = Vec::new();
    let mut panel = Vec::new();
    let mut gamma = Vec::new();
    let mut columns: [Vec<f64>; 6] = Default::default();
    for (h, rec) in record.halves.iter() {
        for (i, ((&g, c), n)) in rec
            .gamma
            .iter()
            .zip(&rec.collocation)
            .zip(&rec.normals)
            .enumerate()
        {
            half.push(h.label());
            panel.push(i as u32);
            gamma.push(g);
            for (column, value) in columns.iter_mut().zip([c.x, c.y, c.z, n.x, n.y, n.z]) {
                column.push(value);
            }
        }
    }
    let [x, y, z, nx, ny, nz] = columns;
    let rows = half.len();
    df!(
        "step" => vec![record.step as u32; rows],
        "time" => vec![record.time; rows],
        "half" => half,
        "panel" => panel,
        "gamma" => gamma,
        "x" => x,
        "y" => y,
        "z" => z,
        "nx" => nx,
        "ny" => ny,
        "nz" => nz,
    )
}

/// Wake ring corners, four rows per ring.
fn wake_frame(record: &StepRecord) -> PolarsResult<DataFrame> {
    let mut half = Vec::new();
    let mut ring = Vec::new();
    let mut corner = Vec::new();
    let mut gamma = Vec::new();
    let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
    for (h, rec) in record.halves.iter() {
        for (i, filament) in rec.wake.iter().enumerate() {
            for (k, c) in filament.ring.corners.iter().enumerate() {
                half.push(h.label());
                ring.push(i as u32);
                corner.push(k as u32);
                gamma.push(filament.gamma);
                x.push(c.x);
                y.push(c.y);
                z.push(c.z);
            }
        }
    }
    df!(
        "half" => half,
        "ring" => ring,
        "corner" => corner,
        "gamma" => gamma,
        "x" => x,
        "y" => y,
        "z" => z,
    )
}

/// Force and moment history with one column group per half plus the total.
pub fn forces_frame(history: &ForceHistory) -> PolarsResult<DataFrame> {
    let mut columns = vec![Column::new("time".into(), &history.time)];
    let groups = WingHalf::ALL
        .iter()
        .map(|&half| (half.label(), &history.halves[half]))
        .chain(std::iter::once(("total", &history.total)));
    for (label, loads) in groups {
        let components: [(&str, fn(&Loads) -> f64); 6] = [
            ("fx", |l| l.force.x),
            ("fy", |l| l.force.y),
            ("fz", |l| l.force.z),
            ("mx", |l| l.moment.x),
            ("my", |l| l.moment.y),
            ("mz", |l| l.moment.z),
        ];
        for (suffix, get) in components {
            let values: Vec<f64> = loads.iter().map(get).collect();
            columns.push(Column::new(format!("{label}_{suffix}").into(), values));
        }
    }
    DataFrame::new(columns)
}

/// Writes `forces.csv` (solver units) and `forces_si.csv` into `folder`.
pub fn write_forces(folder: &Path, solver: &ForceHistory, si: &ForceHistory) -> Result<[PathBuf; 2]> {
    let paths = [folder.join("forces.csv"), folder.join("forces_si.csv")];
    write_csv(&paths[0], &mut forces_frame(solver)?)?;
    write_csv(&paths[1], &mut forces_frame(si)?)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tombo_calc::{Config, Simulation};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tombo-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn short_config(nstep: usize) -> Config {
        let mut config = Config::default();
        config.simulation.nstep = nstep;
        config
    }

    #[test]
    fn test_forces_frame_layout() {
        let (simulation, scales) = Simulation::from_config(&short_config(5)).unwrap();
        let output = simulation.run(&mut tombo_calc::NoObserver).unwrap();
        let forces = output.forces.unwrap();
        let frame = forces_frame(&forces.to_dimensional(&scales)).unwrap();
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.width(), 1 + 5 * 6);
        assert!(frame.column("rl_fz").is_ok());
        assert!(frame.column("total_my").is_ok());
    }

    #[test]
    fn test_snapshot_writer_writes_every_step() {
        // More steps than the queue holds: the march waits, nothing is dropped
        let nstep = 2 * SNAPSHOT_QUEUE + 1;
        let dir = scratch_dir("snapshots");
        let mut writer = SnapshotWriter::spawn(&dir).unwrap();
        let (simulation, _) = Simulation::from_config(&short_config(nstep)).unwrap();
        simulation.run(&mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), nstep);
        for step in 0..nstep {
            let name = format!("step_{step:05}.csv");
            assert!(dir.join("gamma").join(&name).is_file());
            assert!(dir.join("wake").join(&name).is_file());
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_panel_frame_has_row_per_panel() {
        let (mut simulation, _) = Simulation::from_config(&short_config(2)).unwrap();

        struct Capture(Option<StepRecord>);
        impl StepObserver for Capture {
            fn on_step(&mut self, snapshot: &StepSnapshot<'_>) {
                self.0 = Some(StepRecord::capture(snapshot));
            }
        }

        let mut capture = Capture(None);
        simulation.step(&mut capture).unwrap();
        let record = capture.0.unwrap();
        let panels: usize = record.halves.iter().map(|(_, h)| h.gamma.len()).sum();
        assert_eq!(panel_frame(&record).unwrap().height(), panels);
        // one batch of border rings per half, four corners each
        let rings: usize = record.halves.iter().map(|(_, h)| h.wake.len()).sum();
        assert_eq!(wake_frame(&record).unwrap().height(), 4 * rings);
        assert!(rings > 0);
    }
}
