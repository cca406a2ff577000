use anyhow::Result;
use clap::Parser;

use cartpole::cli::{self, Args};
use ql::discretizer::{BinConfig, Discretizer};
use ql::prelude::QlError;
use ql::q_table::QTable;

mod common;

fn args(cmdline: &[&str]) -> Args {
    Args::parse_from(std::iter::once("cartpole-ql").chain(cmdline.iter().copied()))
}

#[test]
fn test_train_then_test_in_one_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("cartpole.npy");
    let model_arg = model.to_string_lossy().to_string();
    // testing in the same run accepts a model that only training is going to write
    assert!(!model.exists());

    cli::run(&args(&["--train", "--test", "--no-render", "--episodes", "30", "--model", &model_arg]))?;

    let table = QTable::load(&model)?;
    let state_count = Discretizer::new(&BinConfig::cartpole())?.state_count();
    assert_eq!((table.rows(), table.actions()), (state_count, 2));
    assert!(table.values().iter().any(|&v| v > 0.0));
    Ok(())
}

#[test]
fn test_saved_model_can_be_tested_later() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let model = dir.path().join("v1.npy");
    let model_arg = model.to_string_lossy().to_string();

    cli::run(&args(&["--env-id", "CartPole-v1", "--train", "--episodes", "10", "--seed", "4", "--model", &model_arg]))?;
    assert!(model.exists());
    cli::run(&args(&["--env-id", "CartPole-v1", "--test", "--no-render", "--model", &model_arg]))
}

#[test]
fn test_model_of_wrong_shape_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // 9999 rows is the layout of tables written with a fixed decimal radix; the dense layout needs 10000
    for rows in [16, 9999] {
        let model = dir.path().join(format!("rows_{}.npy", rows));
        QTable::new(rows, 2)?.save(&model)?;
        let model_arg = model.to_string_lossy().to_string();

        let e = cli::run(&args(&["--test", "--no-render", "--model", &model_arg])).unwrap_err();
        assert!(matches!(e.downcast_ref::<QlError>(), Some(QlError::ShapeMismatch(_))), "{:?}", e);
    }
    Ok(())
}
