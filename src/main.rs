fn main() {
    cradle::cli::run();
}
