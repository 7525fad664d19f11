fn main() {
    stayx_monitor_lib::run()
}
