fn main() {
    aritygen::cli::run();
}
