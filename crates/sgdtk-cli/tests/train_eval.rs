use std::fmt::Write as _;
use std::path::Path;

use clap::Parser;
use sgdtk_checkpoint::ModelReader;
use sgdtk_cli::{Cli, Commands, EvalCommand, TrainCommand};
use tempfile::tempdir;

/// Alternating classes: positives fire feature 0, negatives feature 1, and
/// both share one of the noise features 2..5.
fn write_dataset(path: &Path, n: usize) {
    let mut text = String::new();
    for i in 0..n {
        let noise = 2 + i % 3;
        if i % 2 == 0 {
            writeln!(text, "+1 0:1.0 {}:0.5", noise).unwrap();
        } else {
            writeln!(text, "-1 1:1.0 {}:0.5 # negative", noise).unwrap();
        }
    }
    std::fs::write(path, text).unwrap();
}

fn parse_train(args: &[&str]) -> TrainCommand {
    let argv = ["sgdtk", "train"].iter().chain(args.iter()).copied();
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Train(cmd) => cmd,
        other => panic!("expected train, got {:?}", other),
    }
}

fn parse_eval(args: &[&str]) -> EvalCommand {
    let argv = ["sgdtk", "eval"].iter().chain(args.iter()).copied();
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Eval(cmd) => cmd,
        other => panic!("expected eval, got {:?}", other),
    }
}

#[test]
fn test_train_save_and_eval() {
    let dir = tempdir().unwrap();
    let train = dir.path().join("train.svm");
    let heldout = dir.path().join("heldout.svm");
    let model = dir.path().join("out/model.bin");
    write_dataset(&train, 24);
    // The held-out set uses an index the training set never saw.
    std::fs::write(&heldout, "+1 0:1.0 9:4.0\n-1 1:1.0\n").unwrap();

    let cmd = parse_train(&[
        "--train",
        train.to_str().unwrap(),
        "--eval",
        heldout.to_str().unwrap(),
        "--model",
        model.to_str().unwrap(),
        "--loss",
        "log",
        "--lambda",
        "0.01",
        "--epochs",
        "3",
    ]);
    let reports = cmd.run().unwrap();

    assert_eq!(reports.len(), 3);
    let last = reports.last().unwrap();
    assert_eq!(last.train.count(), 24);
    assert_eq!(last.train.error(), 0.0);
    let heldout_metrics = last.eval.as_ref().unwrap();
    assert_eq!(heldout_metrics.count(), 2);
    assert_eq!(heldout_metrics.error(), 0.0);

    let saved = ModelReader::for_path(&model).read_from_file(&model).unwrap();
    assert_eq!(saved.width(), 5);
    assert!(saved.has_bias());

    let eval = parse_eval(&[
        "--model",
        model.to_str().unwrap(),
        "--data",
        train.to_str().unwrap(),
        "--loss",
        "log",
        "--lambda",
        "0.01",
    ]);
    let metrics = eval.run().unwrap();
    assert_eq!(metrics.count(), last.train.count());
    assert_eq!(metrics.errors(), last.train.errors());
    assert!((metrics.loss() - last.train.loss()).abs() < 1e-12);
    assert!((metrics.cost() - last.train.cost()).abs() < 1e-9);
}

#[test]
fn test_config_file_with_json_gzip_model() {
    let dir = tempdir().unwrap();
    let train = dir.path().join("train.svm");
    let model = dir.path().join("model.json.gz");
    let config = dir.path().join("train.json");
    write_dataset(&train, 12);

    let json = serde_json::json!({
        "train": train,
        "model": model,
        "loss": "hinge",
        "lambda": 0.001,
        "epochs": 2,
        "use_bias": false,
    });
    std::fs::write(&config, json.to_string()).unwrap();

    let cmd = parse_train(&["--config", config.to_str().unwrap(), "--epochs", "4"]);
    let reports = cmd.run().unwrap();
    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.eval.is_none()));

    let bytes = std::fs::read(&model).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    let saved = ModelReader::for_path(&model).read_from_file(&model).unwrap();
    assert_eq!(saved.width(), 5);
    assert!(!saved.has_bias());
}

#[test]
fn test_explicit_width_rejects_wider_training_data() {
    let dir = tempdir().unwrap();
    let train = dir.path().join("train.svm");
    write_dataset(&train, 6);

    let cmd = parse_train(&["--train", train.to_str().unwrap(), "--width", "3"]);
    let err = cmd.run().expect_err("noise features exceed width 3");
    assert!(err.to_string().contains("Failed to load training data"));
}

#[test]
fn test_missing_training_file() {
    let dir = tempdir().unwrap();
    let train = dir.path().join("absent.svm");
    let cmd = parse_train(&["--train", train.to_str().unwrap()]);
    assert!(cmd.run().is_err());
}
