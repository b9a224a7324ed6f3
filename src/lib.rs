//! Wavy - Acquisition audio temps réel
//!
//! Capture un périphérique d'entrée, affiche le signal en continu, garde
//! une fenêtre d'enregistrement et l'exporte en fichier de données.

pub mod audio;
pub mod buffer;
pub mod capture;
pub mod config;
pub mod export;
pub mod session;
pub mod view;
