pub mod ask;
pub mod context;
pub mod doctor;
pub mod init;
pub mod serve;
