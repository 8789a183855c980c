pub mod files;
pub mod store;

pub use files::{
    atomic_write, config_file, ensure_data_dir, get_data_dir, init_local_data_dir, log_file,
    todos_file, DATA_DIR_NAME,
};
pub use store::{JsonStore, MemoryStore, StoreError, TodoStore, TodosState};
