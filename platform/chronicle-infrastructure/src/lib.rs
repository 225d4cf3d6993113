pub mod tick_files;
