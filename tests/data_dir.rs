use std::fs;

use toolkit_cli::addressbook::AddressBook;
use toolkit_cli::config::DataPaths;
use toolkit_cli::convert::{csv_to_json, json_to_csv};
use toolkit_cli::files::FileOrganizer;
use toolkit_cli::habits::HabitTracker;
use toolkit_cli::notes::NotesManager;
use toolkit_cli::tasks::{TaskManager, TaskOrder};

fn data_dir() -> (tempfile::TempDir, DataPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));
    paths.ensure().unwrap();
    (dir, paths)
}

#[test]
fn every_store_lives_under_the_data_dir() {
    let (_dir, paths) = data_dir();

    TaskManager::open(paths.tasks())
        .add("write report", 2, None, vec!["work".into()])
        .unwrap();
    NotesManager::open(paths.notes())
        .add("idea", "try the thing", vec![])
        .unwrap();
    HabitTracker::open(paths.habits())
        .mark("stretch", Some("2099-03-01"), true)
        .unwrap();
    AddressBook::open(paths.address_book())
        .unwrap()
        .add("Dana", "dana@example.com", "")
        .unwrap();

    for file in ["tasks.json", "notes.json", "habits.json", "addressbook.sqlite3"] {
        assert!(paths.root().join(file).is_file(), "{file} missing");
    }

    let tasks = TaskManager::open(paths.tasks());
    let listed = tasks.list(false, Some("work"), TaskOrder::Id);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "write report");
    assert_eq!(NotesManager::open(paths.notes()).search("THING").len(), 1);
    assert_eq!(HabitTracker::open(paths.habits()).monthly_stats("stretch", 2099, 3).done, 1);
    assert_eq!(AddressBook::open(paths.address_book()).unwrap().list("dana").unwrap().len(), 1);
}

#[test]
fn exported_tasks_convert_to_csv_and_back() {
    let (_dir, paths) = data_dir();
    let mut tm = TaskManager::open(paths.tasks());
    tm.add("a, with comma", 1, Some("2099-01-01".into()), vec![]).unwrap();
    tm.add("b", 4, None, vec!["x".into()]).unwrap();

    let csv = paths.root().join("tasks.csv");
    let (rows, cols) = json_to_csv(&paths.tasks(), &csv).unwrap();
    assert_eq!((rows, cols), (2, 6));
    let header = fs::read_to_string(&csv).unwrap();
    assert!(header.starts_with("done,due,id,priority,tags,title\r\n"));

    let json = paths.root().join("tasks_back.json");
    assert_eq!(csv_to_json(&csv, &json).unwrap(), (2, 6));
    let back: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(back[0]["title"], "a, with comma");
    assert_eq!(back[1]["due"], "");
    assert_eq!(back[1]["tags"], "[\"x\"]");
}

#[test]
fn organizer_sorts_a_download_folder() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["report.PDF", "photo.jpg", "Makefile", "notes.pdf"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    let organizer = FileOrganizer::new(dir.path());
    let plan = organizer.plan().unwrap();
    assert_eq!(plan["pdf"], ["notes.pdf", "report.PDF"]);

    let moves = organizer.apply(false).unwrap();
    assert_eq!(moves.len(), 4);
    assert!(dir.path().join("pdf/report.PDF").is_file());
    assert!(dir.path().join("_no_ext/Makefile").is_file());
    assert!(organizer.plan().unwrap().is_empty());
}
