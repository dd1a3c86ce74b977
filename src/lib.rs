// src/lib.rs

// Declaração dos módulos da aplicação. O binário (main.rs) e os testes de
// integração consomem tudo a partir daqui.
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
