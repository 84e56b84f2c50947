fn main() {
    env_logger::init();
    let command_line_interface = idlcast::cli::CommandLineInterface::load();
    command_line_interface.run();
}
