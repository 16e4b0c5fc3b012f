// Core/business logic: scanning the received-files folder, searching,
// compressing and deleting files, and handing files to other applications.
// Nothing in here touches egui.

pub mod archive;
pub mod delete;
pub mod format;
pub mod launch;
pub mod scan;
pub mod search;
