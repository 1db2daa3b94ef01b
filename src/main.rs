fn main() -> std::process::ExitCode {
    wuwa_ocr_lib::run()
}
