use crate::types::{Size, VocBox, YoloBox};

/// Intersection over union of two axis-aligned boxes.
///
/// Returns 0 as soon as the boxes fail to overlap on either axis.
pub fn bbox_iou(a: &VocBox, b: &VocBox) -> f64 {
    let inter_w = a.xmax.min(b.xmax) - a.xmin.max(b.xmin);
    let inter_h = a.ymax.min(b.ymax) - a.ymin.max(b.ymin);
    if inter_w <= 0.0 || inter_h <= 0.0 {
        return 0.0;
    }

    let inter = inter_w * inter_h;
    inter / (a.area() + b.area() - inter)
}

/// Convert a pixel box to a box normalized by the image size.
pub fn voc_to_yolo(bbox: &VocBox, size: Size) -> YoloBox {
    let width = size.width as f64;
    let height = size.height as f64;

    let cx = (bbox.xmin + bbox.xmax) / 2.0;
    let cy = (bbox.ymin + bbox.ymax) / 2.0;
    let w = bbox.xmax - bbox.xmin;
    let h = bbox.ymax - bbox.ymin;

    YoloBox {
        cx: cx / width,
        cy: cy / height,
        w: w / width,
        h: h / height,
    }
}

/// Inverse of [`voc_to_yolo`].
pub fn yolo_to_voc(bbox: &YoloBox, size: Size) -> VocBox {
    let width = size.width as f64;
    let height = size.height as f64;

    let cx = bbox.cx * width;
    let cy = bbox.cy * height;
    let half_w = bbox.w * width / 2.0;
    let half_h = bbox.h * height / 2.0;

    VocBox::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}
