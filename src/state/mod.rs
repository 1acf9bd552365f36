// State management module
// Handles file system storage of separated artifacts and run reports

pub mod storage;

pub use storage::{
    calculate_sha256, get_app_data_dir, get_run_dir, read_file, store_artifact, store_json,
    StorageError, StorageResult, StoredArtifact,
};
