fn main() {
    std::process::exit(roost::run() as i32)
}
