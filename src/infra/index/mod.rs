pub mod directory_archive;

pub use directory_archive::DirectoryArchive;
