//! Embeds Windows resource metadata so Task Manager shows the app name.

fn main() {
    #[cfg(windows)]
    {
        let mut res = winres::WindowsResource::new();
        res.set("ProductName", "aman");
        res.set("FileDescription", "aman");
        res.set("ProductVersion", env!("CARGO_PKG_VERSION"));
        res.set("FileVersion", env!("CARGO_PKG_VERSION"));

        let icon = std::path::Path::new("assets").join("icon.ico");
        if icon.exists() {
            res.set_icon(&icon.to_string_lossy());
        }

        if let Err(e) = res.compile() {
            println!("cargo:warning=Failed to embed Windows resources: {}", e);
        }
    }
    println!("cargo:rerun-if-changed=assets/icon.ico");
}
