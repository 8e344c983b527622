pub mod command_processor;
