fn main() {
    mcmirror_lib::run()
}
