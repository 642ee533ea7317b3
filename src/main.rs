fn main() {
    if let Err(err) = sysreport::cli::run() {
        if !sysreport::exit::already_reported(&err) {
            sysreport::ui::eprintln_error(&err);
        }
        std::process::exit(sysreport::exit::exit_code(&err));
    }
}
