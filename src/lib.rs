pub mod core {
    pub mod command;
    pub mod controller;
    pub mod domain;
    pub mod events;
    pub mod library;
    pub mod repository;
    pub mod view;
}
pub mod utils {
    pub mod cql;
    pub mod date;
    pub mod memory;
    pub mod okapi;
}
pub mod checkout;
pub mod desk;
pub mod gateway;
pub mod items;
pub mod patrons;
pub mod settings;
