//! Raw uinput ioctl wrappers (`linux/uinput.h`).

use nix::{ioctl_none, ioctl_read_buf, ioctl_write_int, ioctl_write_ptr};

const UINPUT_IOCTL_BASE: u8 = b'U';

ioctl_none!(ui_dev_create, UINPUT_IOCTL_BASE, 1);
ioctl_none!(ui_dev_destroy, UINPUT_IOCTL_BASE, 2);
ioctl_write_ptr!(ui_dev_setup, UINPUT_IOCTL_BASE, 3, libc::uinput_setup);
ioctl_read_buf!(ui_get_sysname, UINPUT_IOCTL_BASE, 44, u8);

ioctl_write_int!(ui_set_evbit, UINPUT_IOCTL_BASE, 100);
ioctl_write_int!(ui_set_keybit, UINPUT_IOCTL_BASE, 101);
ioctl_write_int!(ui_set_relbit, UINPUT_IOCTL_BASE, 102);
