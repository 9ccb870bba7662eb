pub mod core {
    pub mod car;
    pub mod clock;
    pub mod handle_race;
    pub mod race;
    pub mod tireset;
}
pub mod error;
pub mod interfaces {
    pub mod broadcast_interface;
    pub mod signal_interface;
}
pub mod post {
    pub mod race_result;
}
pub mod pre {
    pub mod read_sim_pars;
    pub mod sim_opts;
}
